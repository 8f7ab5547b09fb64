pub mod bar;
pub mod bars;
pub mod ohlc;
pub mod request_params;
pub mod time_span;
pub mod timeframe;
