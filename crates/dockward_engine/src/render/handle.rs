//! Opaque resource handles
//!
//! Index 0 is reserved for the null handle returned by failed loads.

use std::fmt;

macro_rules! resource_handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u32);

        impl $name {
            /// Handle that refers to nothing
            pub const NULL: $name = $name(0);

            pub(crate) fn from_index(index: u32) -> Self {
                $name(index)
            }

            /// Whether this is the null handle
            pub fn is_null(self) -> bool {
                self.0 == 0
            }

            /// Raw index, 0 for null
            pub fn index(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_null() {
                    write!(f, "{}(null)", stringify!($name))
                } else {
                    write!(f, "{}({})", stringify!($name), self.0)
                }
            }
        }
    };
}

resource_handle!(
    /// Loaded mesh
    MeshHandle
);
resource_handle!(
    /// Loaded texture
    TextureHandle
);
resource_handle!(
    /// Material: shader parameters plus an optional texture
    MaterialHandle
);
