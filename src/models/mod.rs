pub mod daily_log;
pub mod exercise;
pub mod profile;
pub mod settings;
pub mod workout;

pub use daily_log::{DailyLogRow, DailyWorkoutLogEntry, LogStatus, LoggedWorkoutType};
pub use exercise::{BandColor, ExerciseLogEntry, ExerciseRow, NewExerciseLogEntry};
pub use profile::Profile;
pub use settings::{TtsSettings, TtsSettingsRow};
pub use workout::{DayStatus, WorkoutType};
