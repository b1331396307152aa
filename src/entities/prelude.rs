pub use super::profiles::Entity as Profiles;
pub use super::search_bar::Entity as SearchBar;
