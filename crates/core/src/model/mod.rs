mod conditional;

pub use conditional::ConditionalModel;
