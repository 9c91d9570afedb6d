pub mod error;
pub mod matrix;
pub mod recommend;
pub mod session;
pub mod similarity;

pub use error::ModelError;
pub use matrix::TradeMatrix;
pub use recommend::{recommend, RecommendOptions};
pub use session::ModelState;
pub use similarity::SimilarityTable;
