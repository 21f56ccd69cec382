pub mod enhancement_service;
pub use enhancement_service::{
    EnhanceRequest, EnhancementError, EnhancementService, HistoryFilter,
};

pub mod enhancement_service_impl;
pub use enhancement_service_impl::GeminiEnhancementService;
