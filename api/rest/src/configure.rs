use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::{
    error_handler::{json_error_handler, multipart_error_handler, path_error_handler},
    service::{
        file::file_api, member::member_api, project::project_api, root::root_api, user::user_api,
    },
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(MultipartFormConfig::default().error_handler(multipart_error_handler))
        .configure(root_api)
        .configure(user_api)
        .configure(project_api)
        .configure(member_api)
        .configure(file_api);
}
