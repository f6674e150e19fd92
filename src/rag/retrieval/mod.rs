pub mod engine;
pub mod pinecone;

pub use engine::{QueryParams, RerankSpec, VectorStore};
pub use pinecone::{PineconeClient, PineconeSettings};
