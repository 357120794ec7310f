#[derive(Debug)]
pub struct ApiUrls;

impl ApiUrls {
    pub const INDEX: &'static str = "/";
    pub const HEALTH: &'static str = "/health";

    // Events - JSON APIs
    pub const EVENTS: &'static str = "/api/events/";
    pub const EVENTS_RANDOM: &'static str = "/api/events/random/";
    pub const EVENTS_CHART: &'static str = "/api/events/chart/";
    pub const EVENTS_LATEST: &'static str = "/api/events/latest/";

    // People - JSON APIs
    pub const PEOPLE: &'static str = "/api/people/";
    pub const PEOPLE_RANDOM: &'static str = "/api/people/random/";

    // Dashboard widgets - JSON APIs
    pub const DASHBOARD_STATS: &'static str = "/api/dashboard/stats/";
    pub const DASHBOARD_TIMELINE: &'static str = "/api/dashboard/activity-timeline/";
    pub const DASHBOARD_CHANNEL_BREAKDOWN: &'static str = "/api/dashboard/channel-breakdown/";
    pub const DASHBOARD_MONTHLY_CHART: &'static str = "/api/dashboard/monthly-chart/";
}
