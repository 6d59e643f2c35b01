#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    pub redis_url: Option<String>,
    pub allowed_origins: Vec<String>,
    // Ola Maps geocoding / directions
    pub ola_maps_api_key: String,
    pub ola_maps_base_url: String,
    // Cloudinary unsigned uploads
    pub cloudinary_upload_url: String,
    pub cloudinary_upload_preset: String,
    // Web3Forms contact relay
    pub web3forms_access_key: String,
    pub web3forms_url: String,
    pub google_client_id: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");
        let jwt_maxage = std::env::var("JWT_MAXAGE").expect("JWT_MAXAGE must be set");
        let app_url = std::env::var("APP_URL").expect("APP_URL must be set");

        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8000);

        let redis_url = std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty());

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let ola_maps_api_key = std::env::var("OLA_MAPS_API_KEY")
            .unwrap_or_else(|_| "".to_string());
        let ola_maps_base_url = std::env::var("OLA_MAPS_BASE_URL")
            .unwrap_or_else(|_| "https://api.olamaps.io".to_string());

        let cloudinary_upload_url = std::env::var("CLOUDINARY_UPLOAD_URL")
            .unwrap_or_else(|_| "".to_string());
        let cloudinary_upload_preset = std::env::var("CLOUDINARY_UPLOAD_PRESET")
            .unwrap_or_else(|_| "Hire.me".to_string());

        let web3forms_access_key = std::env::var("WEB3FORMS_ACCESS_KEY")
            .unwrap_or_else(|_| "".to_string());
        let web3forms_url = std::env::var("WEB3FORMS_URL")
            .unwrap_or_else(|_| "https://api.web3forms.com/submit".to_string());

        let google_client_id = std::env::var("GOOGLE_CLIENT_ID")
            .unwrap_or_else(|_| "".to_string());

        Config {
            database_url,
            app_url,
            jwt_secret,
            jwt_maxage: jwt_maxage.parse::<i64>().expect("JWT_MAXAGE must be a number of minutes"),
            port,
            redis_url,
            allowed_origins,
            ola_maps_api_key,
            ola_maps_base_url,
            cloudinary_upload_url,
            cloudinary_upload_preset,
            web3forms_access_key,
            web3forms_url,
            google_client_id,
        }
    }
}
