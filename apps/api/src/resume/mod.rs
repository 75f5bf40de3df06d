//! Résumé domain: canonical document handling, the advisory engines and the
//! persistence, archive and HTTP shells around them.

pub mod archive;
pub mod handlers;
pub mod markdown;
pub mod normalize;
pub mod recommendations;
pub mod reconcile;
pub mod store;
pub mod templates;
pub mod validation;
pub mod view;
