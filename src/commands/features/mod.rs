pub(super) mod alerts;
pub(super) mod forecast;
pub(super) mod health;
pub(super) mod recent;
pub(super) mod status;
