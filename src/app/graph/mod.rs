mod build;
mod interaction;
mod tooltip;
mod view;
