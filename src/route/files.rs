use std::path::PathBuf;

use rocket::fs::NamedFile;
use rocket::State;

use crate::media::MediaStore;

/// Serves stored registration documents back under the URLs recorded on
/// student entities.
#[get("/uploads/<file..>")]
pub async fn upload_file(file: PathBuf, media: &State<MediaStore>) -> Option<NamedFile> {
    NamedFile::open(media.root().join(file)).await.ok()
}
