use folio_core_contact_impl::ContactFeatureServiceImpl;
use folio_core_health_impl::HealthFeatureServiceImpl;
use folio_email_impl::{template::TemplateEmailServiceImpl, EmailServiceImpl};
use folio_shared_impl::{rate_limit::MemoryRateLimitServiceImpl, time::TimeServiceImpl};
use folio_templates_impl::TemplateServiceImpl;

// API
pub type RestServer = folio_api_rest::RestServer<HealthFeature, ContactFeature>;

// Email
pub type Email = EmailServiceImpl;
pub type TemplateEmail = TemplateEmailServiceImpl<Email, Template>;

// Shared
pub type Time = TimeServiceImpl;
pub type RateLimit = MemoryRateLimitServiceImpl<Time>;

// Templates
pub type Template = TemplateServiceImpl;

// Core
pub type HealthFeature = HealthFeatureServiceImpl<Time, Email>;
pub type ContactFeature = ContactFeatureServiceImpl<RateLimit, TemplateEmail>;
