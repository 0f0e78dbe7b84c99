use crate::environ::Environ;
use crate::filter::{EgressFilter, Response};
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::BoxError;

pin_project! {
    /// Future for egress service responses.
    pub struct ResponseFuture<Fut, F> {
        #[pin]
        inner: Fut,
        environ: Environ,
        filter: Arc<F>,
    }
}

impl<Fut, F> ResponseFuture<Fut, F> {
    pub(crate) fn new(inner: Fut, environ: Environ, filter: Arc<F>) -> Self {
        Self {
            inner,
            environ,
            filter,
        }
    }
}

impl<Fut, F, E> Future for ResponseFuture<Fut, F>
where
    Fut: Future<Output = Result<Response, E>>,
    E: Into<BoxError>,
    F: EgressFilter,
{
    type Output = Result<Response, BoxError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        match this.inner.poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => Poll::Ready(Err(e.into())),
            Poll::Ready(Ok(response)) => {
                let filtered = this.filter.filter(this.environ, response);
                Poll::Ready(filtered.map_err(Into::into))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::body::Body;
    use crate::decision::{BypassReason, Decision};
    use crate::environ::{ACCEPT_ENCODING, COMPRESSION, Environ};
    use crate::error::Error;
    use crate::filter::{CompressionFilter, Response};
    use crate::headers::Headers;
    use crate::layer::EgressLayer;
    use std::convert::Infallible;
    use std::future::Future;
    use std::io::Read;
    use std::pin::pin;
    use std::sync::{Arc, Mutex};
    use std::task::{Context, Poll};
    use tower::{BoxError, Layer, Service, ServiceExt, service_fn};

    fn block_on<F: Future>(fut: F) -> F::Output {
        let waker = std::task::Waker::noop();
        let mut cx = Context::from_waker(waker);
        let mut fut = pin!(fut);
        loop {
            if let Poll::Ready(out) = fut.as_mut().poll(&mut cx) {
                return out;
            }
        }
    }

    async fn hello(_: Environ) -> Result<Response, Infallible> {
        let headers: Headers = [("Content-Type", "text/plain"), ("Content-Length", "100")]
            .into_iter()
            .collect();
        Ok(Response::new(
            "200 OK",
            headers,
            Body::once(vec![b'a'; 100]),
        ))
    }

    fn gunzip(body: Body) -> Vec<u8> {
        let data: Vec<u8> = body.into_chunks().flat_map(|c| c.to_vec()).collect();
        let mut out = Vec::new();
        flate2::read::GzDecoder::new(&data[..])
            .read_to_end(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_layer_compresses_application_output() {
        let filter = CompressionFilter::with_level(1).unwrap();
        let service = EgressLayer::with_filter(filter).layer(service_fn(hello));

        let environ = Environ::new().with(ACCEPT_ENCODING, "gzip, deflate");
        let response = block_on(service.oneshot(environ)).unwrap();

        assert_eq!(response.status, "200 OK");
        let (_, encoding) = response.headers.find("content-encoding").unwrap();
        assert_eq!(encoding, "gzip");
        assert_eq!(gunzip(response.body), vec![b'a'; 100]);
    }

    #[test]
    fn test_layer_sees_request_environ() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let filter =
            CompressionFilter::new().log(move |d: &Decision| sink.lock().unwrap().push(d.clone()));
        let mut service = EgressLayer::with_filter(filter).layer(service_fn(hello));

        let environ = Environ::new()
            .with(ACCEPT_ENCODING, "gzip")
            .with(COMPRESSION, false);
        let ready = block_on(service.ready()).unwrap();
        let response = block_on(ready.call(environ)).unwrap();

        assert!(response.headers.find("content-encoding").is_none());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Decision::Bypass(BypassReason::Disabled)]
        );
    }

    #[test]
    fn test_filter_error_is_returned() {
        let broken = service_fn(|_: Environ| async {
            let headers: Headers = [("Content-Type", "text/plain"), ("Content-Length", "x")]
                .into_iter()
                .collect();
            Ok::<_, Infallible>(Response::new("200 OK", headers, Body::once("a")))
        });
        let service = EgressLayer::new().layer(broken);

        let environ = Environ::new().with(ACCEPT_ENCODING, "gzip");
        let err: BoxError = block_on(service.oneshot(environ)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidContentLength(_))
        ));
    }

    #[test]
    fn test_inner_error_is_returned() {
        let failing =
            service_fn(|_: Environ| async { Err::<Response, _>(std::io::Error::other("down")) });
        let service = EgressLayer::new().layer(failing);

        let err = block_on(service.oneshot(Environ::new())).unwrap_err();
        assert_eq!(err.to_string(), "down");
    }
}
