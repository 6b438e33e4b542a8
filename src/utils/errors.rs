pub use seitech_core::errors::AppError;
