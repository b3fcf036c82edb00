// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod landing {
    pub use crate::landing::*;
}

pub mod banner {
    pub use crate::banner::*;
}
