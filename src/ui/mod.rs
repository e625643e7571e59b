pub mod dialogs;
pub mod suggestion_bar;
pub mod task_editor;
pub mod theme;
pub mod timeline_view;
pub mod toolbar;
