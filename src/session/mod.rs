//! Session layer: the preference registry, the live session fed by user
//! edits, startup restoration, and the theme state machine it drives.

pub mod collaborators;
pub mod live;
pub mod registry;
pub mod restore;
pub mod theme;
