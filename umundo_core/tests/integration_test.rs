//! uMundo 核心集成测试
//!
//! 用一个最小的内存传输验证原始传输接口可以作为 trait 对象使用。

// 传输接口集成测试
#[cfg(test)]
mod transport_tests {
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use umundo_core::transport::channel_matches;
    use umundo_core::{
        Greeter, Message, PeerId, PeerIdGenerator, RawPublisher, RawSubscription, Receiver,
        Transport, TransportError,
    };

    // 同步直投的测试传输
    #[derive(Default)]
    struct DirectTransport {
        ids: PeerIdGenerator,
        receivers: Arc<Mutex<Vec<(String, Arc<dyn Receiver>)>>>,
    }

    struct DirectPublisher {
        id: PeerId,
        channel: String,
        receivers: Arc<Mutex<Vec<(String, Arc<dyn Receiver>)>>>,
        greeter: Mutex<Option<Arc<dyn Greeter>>>,
    }

    struct DirectSubscription {
        id: PeerId,
        channel: String,
    }

    #[async_trait]
    impl RawPublisher for DirectPublisher {
        fn id(&self) -> PeerId {
            self.id
        }

        fn channel_name(&self) -> &str {
            &self.channel
        }

        async fn publish(&self, msg: Message) -> Result<(), TransportError> {
            let receivers = self.receivers.lock().unwrap().clone();
            for (channel, receiver) in receivers {
                if channel_matches(&channel, &self.channel) {
                    receiver.receive(&msg);
                }
            }
            Ok(())
        }

        fn set_greeter(&self, greeter: Option<Arc<dyn Greeter>>) {
            *self.greeter.lock().unwrap() = greeter;
        }

        fn subscribers(&self) -> Vec<PeerId> {
            Vec::new()
        }

        async fn wait_for_subscribers(&self, _count: usize, _timeout: Option<Duration>) -> usize {
            self.receivers.lock().unwrap().len()
        }
    }

    impl RawSubscription for DirectSubscription {
        fn id(&self) -> PeerId {
            self.id
        }

        fn channel_name(&self) -> &str {
            &self.channel
        }

        fn is_active(&self) -> bool {
            true
        }

        fn unsubscribe(&self) {}
    }

    impl Transport for DirectTransport {
        fn advertise(&self, channel: &str) -> Result<Arc<dyn RawPublisher>, TransportError> {
            Ok(Arc::new(DirectPublisher {
                id: self.ids.next(),
                channel: channel.to_string(),
                receivers: self.receivers.clone(),
                greeter: Mutex::new(None),
            }))
        }

        fn subscribe(
            &self,
            channel: &str,
            receiver: Arc<dyn Receiver>,
        ) -> Result<Box<dyn RawSubscription>, TransportError> {
            self.receivers
                .lock()
                .unwrap()
                .push((channel.to_string(), receiver));
            Ok(Box::new(DirectSubscription {
                id: self.ids.next(),
                channel: channel.to_string(),
            }))
        }
    }

    #[tokio::test]
    async fn test_transport_as_trait_object() {
        let transport: Box<dyn Transport> = Box::new(DirectTransport::default());
        let received = Arc::new(Mutex::new(Vec::new()));

        let sink = received.clone();
        let sub = transport
            .subscribe(
                "foo",
                Arc::new(move |msg: &Message| sink.lock().unwrap().push(msg.clone())),
            )
            .unwrap();
        assert_eq!(sub.channel_name(), "foo");

        let publisher = transport.advertise("fooChannel").unwrap();
        assert_ne!(publisher.id(), sub.id());

        let mut msg = Message::with_data(vec![0u8, 255]);
        msg.set_type_tag("Raw");
        publisher.publish(msg.clone()).await.unwrap();

        // 不匹配的频道收不到
        let other = transport.advertise("barChannel").unwrap();
        other.publish(Message::new()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], msg);
    }
}

// 错误处理集成测试
#[cfg(test)]
mod error_tests {
    use umundo_core::{ErrorContext, TransportError, UmundoError, UmundoErrorKind};

    #[test]
    fn test_error_display() {
        let err = UmundoError::config("test error");
        assert!(err.to_string().contains("test error"));
    }

    #[test]
    fn test_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: UmundoError = io_err.into();
        assert!(err.to_string().contains("file not found"));

        let err: UmundoError = TransportError::Timeout.into();
        let err = err.with_context(ErrorContext::channel("fooChannel"));
        assert_eq!(err.kind(), UmundoErrorKind::Transport);
    }
}
