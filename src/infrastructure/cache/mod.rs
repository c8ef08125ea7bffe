//! Cache infrastructure - Call cache construction from configuration

mod factory;

pub use factory::CallCacheFactory;
