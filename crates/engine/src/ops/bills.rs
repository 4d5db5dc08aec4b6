//! Gateway-backed bill payments.
//!
//! The payment is reserved in the ledger (debit + pending request) and
//! committed before the provider is called, so the provider never moves
//! money without a ledger record. The provider's answer then settles the
//! request as the system resolver.

use std::sync::Arc;

use gateway::{Action, GatewayRequest, GatewayResponse, Outcome, TelecomGateway};
use sea_orm::TransactionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, LedgerRequest, ProviderService, Quote, RequestKind, RequestStatus, ResultEngine,
};

use super::{Engine, with_tx};

/// Result of [`Engine::pay_bill`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BillPayment {
    pub request: LedgerRequest,
    pub transid: String,
    /// `None` when the provider could not be reached; the request then
    /// stays pending for an administrator.
    pub response: Option<GatewayResponse>,
}

impl Engine {
    fn gateway(&self) -> ResultEngine<&Arc<dyn TelecomGateway>> {
        self.gateway
            .as_ref()
            .ok_or_else(|| EngineError::Provider("no provider gateway configured".to_string()))
    }

    /// Price breakdown for paying `price` for `service`.
    pub fn quote(&self, service: Option<ProviderService>, price: i64) -> ResultEngine<Quote> {
        self.pricing.quote(service, price)
    }

    /// Asks the provider for the balance or due amount of a subscriber.
    pub async fn query_bill(
        &self,
        service: ProviderService,
        subscriber: &str,
    ) -> ResultEngine<GatewayResponse> {
        self.lookup_provider(service, subscriber, Action::Query).await
    }

    /// Read-only provider call: `query`, `solfa` or `billover`.
    ///
    /// `bill` moves money and has to go through [`Engine::pay_bill`].
    pub async fn lookup_provider(
        &self,
        service: ProviderService,
        subscriber: &str,
        action: Action,
    ) -> ResultEngine<GatewayResponse> {
        if !action.is_lookup() {
            return Err(EngineError::InvalidId(format!(
                "{} is not a lookup action",
                action.as_str()
            )));
        }
        let gateway = self.gateway()?;
        let number = service.normalize_subscriber(subscriber)?;
        let request = GatewayRequest::lookup(action, number, service.as_str());
        let response = gateway.call(service.endpoint(), &request).await?;
        tracing::debug!(
            service = service.as_str(),
            action = action.as_str(),
            transid = %request.transid,
            code = %response.result_code,
            "provider lookup answered"
        );
        Ok(response)
    }

    /// Pays `amount` to `service` for `subscriber` on behalf of `user_id`.
    ///
    /// - provider success: the request is approved;
    /// - provider pending: the request stays pending;
    /// - provider failure: the request is rejected, the user refunded and a
    ///   `Provider` error returned;
    /// - transport failure: the request stays pending, since the provider
    ///   may have charged anyway.
    pub async fn pay_bill(
        &self,
        user_id: Uuid,
        service: ProviderService,
        subscriber: &str,
        amount: i64,
    ) -> ResultEngine<BillPayment> {
        let gateway = Arc::clone(self.gateway()?);
        let number = service.normalize_subscriber(subscriber)?;
        let quote = self.quote(Some(service), amount)?;
        let call = GatewayRequest::bill(number.clone(), service.as_str(), amount);
        let transid = call.transid.to_string();

        let mut request = LedgerRequest::pending(RequestKind::BillPayment, user_id, amount);
        request.fee = quote.commission;
        request.service = Some(service);
        request.target = Some(number);
        request.details = Some(format!("transid {transid}"));

        let request = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.insert_pending(&db_tx, request).await
        })?;

        let response = match gateway.call(service.endpoint(), &call).await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(
                    request_id = %request.id,
                    %transid,
                    error = %err,
                    "bill payment left pending: provider unreachable"
                );
                return Ok(BillPayment {
                    request,
                    transid,
                    response: None,
                });
            }
        };

        let request = match response.outcome() {
            Outcome::Success => {
                self.resolve_as_system(request.id, RequestStatus::Approved, None)
                    .await?
            }
            Outcome::Pending => {
                tracing::info!(request_id = %request.id, %transid, "bill payment pending at provider");
                request
            }
            Outcome::Failed { code, message } => {
                tracing::warn!(request_id = %request.id, %transid, %code, %message, "bill payment refused");
                self.resolve_as_system(request.id, RequestStatus::Rejected, Some(&message))
                    .await?;
                return Err(EngineError::Provider(message));
            }
        };

        Ok(BillPayment {
            request,
            transid,
            response: Some(response),
        })
    }
}
