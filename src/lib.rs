//! Client for the virtual try-on and media generation service.
//!
//! A [`Page`](page::page::Page) holds one orchestrator per workflow form
//! plus the collaborators they share: the workflow gate, toast queue,
//! preview overlay and submission trace. All traffic goes through the
//! [`Transport`](http::client::Transport) seam.

pub mod assist;
pub mod cli;
pub mod form;
pub mod http;
pub mod notify;
pub mod page;
pub mod presets;
pub mod render;
pub mod trace;
pub mod workflow;
