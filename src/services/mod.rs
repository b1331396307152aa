pub mod news;
pub use news::{NewsMode, NewsService};

pub mod plan;
pub use plan::{InvestmentPlanRequest, MealPlanRequest, PlanError, PlanKind, PlanService};

pub mod profile_service;
pub use profile_service::{ProfileError, ProfileService, SubscriptionDto};

pub mod profile_service_impl;
pub use profile_service_impl::SeaOrmProfileService;

pub mod search;
pub use search::{Intent, SearchAnswer, SearchError, SearchService};

pub mod session;
pub use session::{CurrentUser, SessionVerifier};
