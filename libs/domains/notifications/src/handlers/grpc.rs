//! gRPC read API over the communication log.

use protos::notifications::{
    emails_service_server::EmailsService, CountUserEmailCommunicationsIn,
    CountUserEmailCommunicationsOut, GetUserEmailCommunicationsIn, GetUserEmailCommunicationsOut,
};
use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::error;

use crate::models::Pagination;
use crate::service::NotificationUseCases;

/// Serves `EmailsService`. Generic over the orchestrator for testability.
pub struct EmailsGrpcService<N> {
    service: Arc<N>,
}

impl<N: NotificationUseCases> EmailsGrpcService<N> {
    pub fn new(service: Arc<N>) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl<N> EmailsService for EmailsGrpcService<N>
where
    N: NotificationUseCases + 'static,
{
    async fn get_user_email_communications(
        &self,
        request: Request<GetUserEmailCommunicationsIn>,
    ) -> Result<Response<GetUserEmailCommunicationsOut>, Status> {
        let req = request.into_inner();
        let pagination = req.pagination.map(Pagination::from);

        let emails = self
            .service
            .get_user_email_communications(req.user_id, pagination)
            .await
            .map_err(|e| {
                error!(user_id = req.user_id, error = %e, "Failed to get user email communications");
                Status::internal(e.to_string())
            })?;

        Ok(Response::new(GetUserEmailCommunicationsOut {
            emails: emails.into_iter().map(Into::into).collect(),
        }))
    }

    async fn count_user_email_communications(
        &self,
        request: Request<CountUserEmailCommunicationsIn>,
    ) -> Result<Response<CountUserEmailCommunicationsOut>, Status> {
        let user_id = request.into_inner().user_id;

        let count = self
            .service
            .count_user_email_communications(user_id)
            .await
            .map_err(|e| {
                error!(user_id, error = %e, "Failed to count user email communications");
                Status::internal(e.to_string())
            })?;

        Ok(Response::new(CountUserEmailCommunicationsOut { count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;
    use crate::models::Email;
    use crate::service::MockNotificationUseCases;
    use chrono::DateTime;
    use mockall::predicate::eq;
    use protos::notifications::Pagination as PbPagination;

    fn email(id: u64) -> Email {
        Email {
            id,
            user_id: 1,
            email: "a@x.com".to_string(),
            content: format!("<p>{}</p>", id),
            sent_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_get_user_email_communications_maps_rows() {
        let mut service = MockNotificationUseCases::new();
        service
            .expect_get_user_email_communications()
            .with(eq(1), eq(Some(Pagination::new(Some(2), None))))
            .times(1)
            .returning(|_, _| Ok(vec![email(3), email(2)]));

        let grpc = EmailsGrpcService::new(Arc::new(service));
        let response = grpc
            .get_user_email_communications(Request::new(GetUserEmailCommunicationsIn {
                user_id: 1,
                pagination: Some(PbPagination {
                    limit: Some(2),
                    offset: None,
                }),
            }))
            .await
            .unwrap()
            .into_inner();

        let ids: Vec<u64> = response.emails.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 2]);
        assert_eq!(response.emails[0].sent_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_get_user_email_communications_without_pagination() {
        let mut service = MockNotificationUseCases::new();
        service
            .expect_get_user_email_communications()
            .with(eq(9), eq(None::<Pagination>))
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let grpc = EmailsGrpcService::new(Arc::new(service));
        let response = grpc
            .get_user_email_communications(Request::new(GetUserEmailCommunicationsIn {
                user_id: 9,
                pagination: None,
            }))
            .await
            .unwrap();

        assert!(response.into_inner().emails.is_empty());
    }

    #[tokio::test]
    async fn test_count_user_email_communications() {
        let mut service = MockNotificationUseCases::new();
        service
            .expect_count_user_email_communications()
            .with(eq(1))
            .returning(|_| Ok(3));

        let grpc = EmailsGrpcService::new(Arc::new(service));
        let response = grpc
            .count_user_email_communications(Request::new(CountUserEmailCommunicationsIn {
                user_id: 1,
            }))
            .await
            .unwrap();

        assert_eq!(response.into_inner().count, 3);
    }

    #[tokio::test]
    async fn test_storage_error_is_internal() {
        let mut service = MockNotificationUseCases::new();
        service
            .expect_count_user_email_communications()
            .returning(|_| Err(NotificationError::Persistence("connection reset".into())));

        let grpc = EmailsGrpcService::new(Arc::new(service));
        let status = grpc
            .count_user_email_communications(Request::new(CountUserEmailCommunicationsIn {
                user_id: 1,
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("connection reset"));
    }
}
