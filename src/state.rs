use std::sync::Arc;

use crate::{
    assets::FsTemplate,
    certificate::CertificateRenderer,
    config::Config,
    ojs::OjsClient,
    verify::VerificationService,
};

pub struct State {
    pub config: Config,
    pub verifier: VerificationService<OjsClient, OjsClient>,
    pub renderer: CertificateRenderer,
}

impl State {
    pub fn new() -> Arc<Self> {
        Self::from_config(Config::load())
    }

    pub fn from_config(config: Config) -> Arc<Self> {
        let ojs = OjsClient::new(&config);
        let template = FsTemplate::new(config.template_path.clone());
        let renderer = CertificateRenderer::new(&template, config.orientation);

        Arc::new(Self {
            config,
            verifier: VerificationService::new(ojs.clone(), ojs),
            renderer,
        })
    }
}
