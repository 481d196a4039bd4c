pub mod queue_trigger;
pub mod timer_trigger;
