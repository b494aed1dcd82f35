//! Constants used throughout the hospital core crate.

/// Database used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://hms.db?mode=rwc";

/// Pool size used when `DB_MAX_CONNECTIONS` is not set.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Page size applied when a list request does not ask for one.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Largest page a list request may ask for.
pub const MAX_LIST_LIMIT: u32 = 500;

/// Role name identifying doctors for availability queries.
pub const DOCTOR_ROLE: &str = "Doctor";

/// Staff status a doctor must hold to be offered for appointments.
pub const ACTIVE_STATUS: &str = "Active";

/// Task status that no longer blocks a staff member's time.
pub const CANCELLED_TASK_STATUS: &str = "Cancelled";

/// Roles inserted by `seed_lookups`.
pub const DEFAULT_STAFF_ROLES: &[(&str, &str)] = &[
    ("Doctor", "Licensed physician"),
    ("Nurse", "Nursing staff"),
    ("Admin", "Administrative staff"),
];

/// Staff statuses inserted by `seed_lookups`.
pub const DEFAULT_STAFF_STATUSES: &[(&str, &str)] = &[
    ("Active", "On duty and bookable"),
    ("OnLeave", "Temporarily unavailable"),
    ("Inactive", "No longer working"),
];

/// Task statuses inserted by `seed_lookups`.
pub const DEFAULT_TASK_STATUSES: &[(&str, &str)] = &[
    ("Pending", "Not started"),
    ("InProgress", "Being worked on"),
    ("Completed", "Finished"),
    ("Cancelled", "Called off"),
];
