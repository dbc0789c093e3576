pub mod controls;
pub mod debug;
pub mod form_view;
pub mod radio_block;
pub mod text_input;
