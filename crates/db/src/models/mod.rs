pub mod meeting;
pub mod meeting_event;
pub mod participant;
pub mod recording;

pub use meeting::Meeting;
pub use meeting_event::MeetingEvent;
pub use participant::{Participant, ParticipantRole};
pub use recording::{Recording, RecordingStatus};
