pub mod clock;
pub mod schema;
pub mod state;
pub mod test_utils;
pub mod utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use state::AppState;
pub use utils::{create_conn, DbPool};
