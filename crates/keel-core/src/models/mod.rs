pub mod constraint_state;
pub mod delivery_config;
pub mod drift;
pub mod events;
pub mod resource;
pub mod resource_status;
