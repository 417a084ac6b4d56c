use crate::configs::Config;
use crate::server::http::create_http_server;
use actix_web::dev::Server;

pub struct Application {
    http_server: Server,
}

impl Application {
    pub async fn build(config: Config) -> Result<Self, std::io::Error> {
        let http_server = create_http_server(&config.app, &config.log).await?;
        Ok(Self { http_server })
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        self.http_server.await
    }
}
