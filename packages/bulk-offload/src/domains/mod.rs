pub mod bulk_actions;
