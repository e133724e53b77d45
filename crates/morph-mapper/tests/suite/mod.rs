mod conversions;
mod pipeline;
mod structured;
