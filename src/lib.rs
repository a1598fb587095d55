// src/lib.rs

pub mod config;
pub mod observation_table;
pub mod aggregator;
pub mod dataset_loader;
pub mod session;

pub use observation_table::ObservationTable;

pub use aggregator::Aggregator;
pub use aggregator::ChannelDelta;
pub use aggregator::PeriodDelta;
pub use aggregator::Reducer;

pub use dataset_loader::CsvFileSource;
pub use dataset_loader::DatasetLoader;
pub use dataset_loader::DatasetSource;
pub use dataset_loader::RemoteCsvSource;
pub use dataset_loader::RemoteJsonSource;

pub use session::DatasetSession;
