mod health_check;
mod subscribers_create;
mod subscribers_delete;
