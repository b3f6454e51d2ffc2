use crate::common::*;

/// The dataset that can be random accessed.
///
/// The sample index is fixed at construction. Implementations hold no mutable
/// state, so `get` can be called from several threads at once.
pub trait RandomAccessDataset
where
    Self: Debug + Send + Sync,
{
    type Record;

    /// Get number of samples in the dataset.
    fn size(&self) -> usize;

    /// Load and normalize the sample at `index`.
    fn get(&self, index: usize) -> Result<Self::Record>;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

pub(crate) fn check_index(index: usize, size: usize) -> Result<()> {
    if index < size {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, size })
    }
}
