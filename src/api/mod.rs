pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AlertEvent, AlertEventsResponse, AlertSubscription, Confidence, NewsItem, NewsResponse,
    PredictionRow, SubscribeRequest, SubscriptionResponse, SummaryResponse,
};
