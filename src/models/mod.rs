pub mod activity_log;
pub mod analysis;
pub mod category;
pub mod household;
pub mod invitation;
pub mod item;
pub mod user;

pub use activity_log::{ActivityAction, ActivityLog, NewActivityLog};
pub use analysis::{Analysis, NewAnalysis};
pub use category::{Category, NewCategory};
pub use household::{Household, HouseholdSummary};
pub use invitation::{Invitation, InvitationStatus};
pub use item::{ChecklistItem, NewChecklistItem, Priority};
pub use user::{NewUser, Role, UserProfile};
