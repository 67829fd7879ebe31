/// Generates `get_<entity>` and `delete_<entity>` on a client wrapping a
/// `ResourceClient`. `$map_err` turns a framework error into the client's
/// error type and receives the id the request was about.
macro_rules! impl_client_methods {
    ($client_name:ident, $entity:ty, $id:ty, $error:ty, $entity_name_snake:ident, $map_err:path) => {
        paste::paste! {
            impl $client_name {
                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: $id) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err(|e| $map_err(Some(id), e))
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: $id) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await.map_err(|e| $map_err(Some(id), e))
                }
            }
        }
    };
}

/// Generates a composer handle method: sends the request with a oneshot
/// responder and waits for the session's answer.
macro_rules! composer_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident) => {
        impl $client {
            #[tracing::instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $crate::error::ComposerError> {
                tracing::debug!("Sending request");
                let (respond_to, response) = tokio::sync::oneshot::channel();
                self.sender
                    .send($request::$variant {
                        $($param,)*
                        respond_to,
                    })
                    .await
                    .map_err(|_| $crate::error::ComposerError::SessionClosed)?;
                response
                    .await
                    .map_err(|_| $crate::error::ComposerError::SessionClosed)?
            }
        }
    };
}
