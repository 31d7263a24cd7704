use envconfig::Envconfig;
use std::net::IpAddr;

#[derive(Envconfig, Clone, Debug)]
pub struct BlogServerConfig {
    #[envconfig(from = "HTTP_HOST", default = "127.0.0.1")]
    pub http_host: IpAddr,

    #[envconfig(from = "HTTP_PORT", default = "3000")]
    pub http_port: u16,

    #[envconfig(from = "DATABASE_URL", default = "sqlite://blog.db")]
    pub database_url: String,

    #[envconfig(from = "DATABASE_MAX_CONNECTIONS", default = "5")]
    pub database_max_connections: u32,

    #[envconfig(from = "BLOG_SITE_NAME", default = "Blog")]
    pub site_name: String,

    #[envconfig(
        from = "BLOG_SITE_DESCRIPTION",
        default = "A small blog with threaded comments and likes."
    )]
    pub site_description: String,

    #[envconfig(from = "MAX_BODY_SIZE_BYTES", default = "1048576")]
    pub max_body_size_bytes: usize,
}

impl BlogServerConfig {
    /// Configuration with every setting at its default except the site name.
    pub fn new(site_name: String) -> Self {
        Self {
            http_host: IpAddr::from([127, 0, 0, 1]),
            http_port: 3000,
            database_url: "sqlite://blog.db".to_string(),
            database_max_connections: 5,
            site_name,
            site_description: String::new(),
            max_body_size_bytes: 1024 * 1024,
        }
    }
}
