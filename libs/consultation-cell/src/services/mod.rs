pub mod consultation;
pub mod lifecycle;
pub mod realtime;

pub use consultation::ConsultationService;
pub use lifecycle::ConsultationLifecycleService;
