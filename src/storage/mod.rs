// ==========================================
// 车间排程系统 - 文件存储层
// ==========================================
// 职责: 受管目录下的文档字节存取，元数据由仓储层负责
// ==========================================

pub mod document_store;

pub use document_store::{DocumentStore, StoredBlob};
