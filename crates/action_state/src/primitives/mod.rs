mod action_state;

pub use action_state::ActionState;
