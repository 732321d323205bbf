//! Backend collaborator traits. Implementations are injected as `Arc<dyn Trait>`.

pub mod catalog;
pub mod lexical;
pub mod reranker;
pub mod retriever;
pub mod sparse;
pub mod vector;

pub use catalog::IConceptCatalog;
pub use lexical::ILexicalSearch;
pub use reranker::IReranker;
pub use retriever::IRetriever;
pub use sparse::ISparseEncoder;
pub use vector::{IEmbedder, IVectorSearch};
