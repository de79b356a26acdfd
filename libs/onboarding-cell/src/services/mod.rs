pub mod consent;
pub mod onboarding;

pub use consent::ConsentService;
pub use onboarding::OnboardingService;
