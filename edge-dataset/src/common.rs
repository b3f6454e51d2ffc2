pub use crate::error::{Error, Result};
pub use indexmap::IndexMap;
pub use log::{debug, info, warn};
pub use ndarray::{s, Array3, ArrayView3, Axis};
pub use noisy_float::prelude::*;
pub use once_cell::sync::Lazy;
pub use rand::prelude::*;
pub use semver::{Version, VersionReq};
pub use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
pub use std::{
    borrow::Cow,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
pub use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator as _};
#[cfg(feature = "with-tch")]
pub use tch::{Device, Kind, Tensor};
