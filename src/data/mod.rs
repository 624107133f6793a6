pub mod contact;
pub mod course;
pub mod student;

pub(crate) fn true_bool() -> bool {
    true
}
