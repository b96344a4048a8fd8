//! SeaORM entities, one module per table.

pub mod calendar_configuration;
pub mod gitlab_api;
pub mod user;

pub mod prelude {
    pub use super::user::Entity as User;
    pub use super::user::Model as UserModel;
    pub use super::user::ActiveModel as UserActiveModel;
    pub use super::user::Column as UserColumn;

    pub use super::gitlab_api::Entity as GitlabApi;
    pub use super::gitlab_api::Model as GitlabApiModel;
    pub use super::gitlab_api::ActiveModel as GitlabApiActiveModel;
    pub use super::gitlab_api::Column as GitlabApiColumn;

    pub use super::calendar_configuration::Entity as CalendarConfiguration;
    pub use super::calendar_configuration::Model as CalendarConfigurationModel;
    pub use super::calendar_configuration::ActiveModel as CalendarConfigurationActiveModel;
    pub use super::calendar_configuration::Column as CalendarConfigurationColumn;
}
