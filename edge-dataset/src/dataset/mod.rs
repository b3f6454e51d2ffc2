//! Dataset indexing and loading.

mod biped;
mod dataset_;
mod index;
mod record;
mod test_dataset;

pub use biped::*;
pub use dataset_::*;
pub use index::*;
pub use record::*;
pub use test_dataset::*;
