use std::error::Error as StdError;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_util::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use http_body::{Body, Frame, SizeHint};

use crate::error::BoxedError;

/// 响应体
///
/// 作为 [`Stream`] 时只能被消费一次：每个分块取出后即从内部移除。
pub enum ResBody {
    /// 空响应体
    None,
    /// 一次性写出的完整内容
    Once(Bytes),
    /// 逐块产出的内容，写入输出文件时不会整体缓存
    Stream(BoxStream<'static, Result<Bytes, BoxedError>>),
}

/// 由完整内容构造响应体
pub fn full<T: Into<Bytes>>(chunk: T) -> ResBody {
    ResBody::Once(chunk.into())
}

/// 由分块流构造响应体
pub fn stream_body<S, O, E>(stream: S) -> ResBody
where
    S: Stream<Item = Result<O, E>> + Send + 'static,
    O: Into<Bytes> + 'static,
    E: Into<Box<dyn StdError + Send + Sync>> + 'static,
{
    ResBody::Stream(stream.map_ok(Into::into).map_err(Into::into).boxed())
}

impl ResBody {
    #[inline]
    pub fn is_stream(&self) -> bool {
        matches!(self, ResBody::Stream(_))
    }
}

impl Stream for ResBody {
    type Item = Result<Bytes, BoxedError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut() {
            ResBody::None => Poll::Ready(None),
            ResBody::Once(bytes) if bytes.is_empty() => Poll::Ready(None),
            ResBody::Once(bytes) => Poll::Ready(Some(Ok(std::mem::take(bytes)))),
            ResBody::Stream(stream) => stream.as_mut().poll_next(cx),
        }
    }
}

impl Body for ResBody {
    type Data = Bytes;
    type Error = BoxedError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        Stream::poll_next(self, cx).map_ok(Frame::data)
    }

    fn is_end_stream(&self) -> bool {
        match self {
            ResBody::None => true,
            ResBody::Once(bytes) => bytes.is_empty(),
            ResBody::Stream(_) => false,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            ResBody::None => SizeHint::with_exact(0),
            ResBody::Once(bytes) => SizeHint::with_exact(bytes.len() as u64),
            ResBody::Stream(_) => SizeHint::default(),
        }
    }
}

impl From<Bytes> for ResBody {
    fn from(value: Bytes) -> ResBody {
        ResBody::Once(value)
    }
}

impl From<String> for ResBody {
    #[inline]
    fn from(value: String) -> ResBody {
        ResBody::Once(value.into())
    }
}

impl From<&'static str> for ResBody {
    fn from(value: &'static str) -> ResBody {
        ResBody::Once(value.into())
    }
}

impl From<Vec<u8>> for ResBody {
    fn from(value: Vec<u8>) -> ResBody {
        ResBody::Once(value.into())
    }
}
